#![deny(unsafe_code)]

pub mod adb;
pub mod avd;
pub mod bridge;
pub mod config;
pub mod env;
pub mod exec;
pub mod opts;
pub mod os;
pub mod sdk;
pub mod util;

pub static NAME: &str = "avdctl";
