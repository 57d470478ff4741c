//! HTTP surface of the Flood API

pub mod rest;
