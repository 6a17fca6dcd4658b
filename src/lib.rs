// NOTE: Allow these for the whole project.
#![allow(clippy::collapsible_if)]
#![allow(clippy::too_many_arguments)]

pub mod log;
pub mod city;
pub mod config;
pub mod minimap;
pub mod render;
pub mod utils;
