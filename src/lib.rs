//! Soccer outcome pricing from scoring rates. Expected goals are estimated from team histories,
//! turned into score distributions by three substitutable models, mapped onto bookmaker markets,
//! compared against offered odds for value, and assembled into multi-fixture combination bets.

#![allow(clippy::too_many_arguments)]

pub mod comb;
pub mod concept;
pub mod domain;
pub mod edge;
pub mod engine;
pub mod error;
pub mod estimate;
pub mod factorial;
pub mod file;
pub mod linear;
pub mod model;
pub mod odds;
pub mod paper;
pub mod poisson;
pub mod print;
pub mod probs;
pub mod scoregrid;
pub mod selection;

#[cfg(test)]
pub(crate) mod testing;

#[doc = include_str!("../README.md")]
#[cfg(doc)]
fn readme() {}
