//! Entropy Mirror library - microphone-driven star field and entropy core

pub mod audio;
pub mod canvas;
pub mod cli;
pub mod cycle;
pub mod entropy_core;
pub mod error;
pub mod field;
pub mod headless;
pub mod math;
pub mod noise;
pub mod params;
pub mod rendering;
pub mod scene;
pub mod snapshot;
