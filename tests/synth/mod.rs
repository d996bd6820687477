//! Behavioural scenarios for synthesising the stack through the CLI.

mod bdd_steps;
mod scenarios;
mod test_helpers;
