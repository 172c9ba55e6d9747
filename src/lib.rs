//! Attack tree risk assessment.
//!
//! An attack tree is a rooted hierarchy of OR/AND gates whose leaves carry
//! estimated monetary impact. The [`domain`] layer builds trees from nested
//! descriptions, evaluates the overall risk exposure and produces breakdowns;
//! the outer layers load files, prompt for values and present results.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
