//! Air quality lookup server.
//!
//! A web application that answers: "what is the air like where I am?"
//! It finds the CPCB monitoring station nearest to a coordinate, then reads
//! that station's current AQI from AQICN through a remote browser session.

pub mod aqicn;
pub mod config;
pub mod cpcb;
pub mod domain;
pub mod lookup;
pub mod web;
