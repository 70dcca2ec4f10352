pub mod amortize;
pub mod portfolio;
