mod fields;
mod geography;
mod run;
mod wages;

pub use run::run;
