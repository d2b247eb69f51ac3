mod engine;
mod output;
mod run;
mod selection;

pub(crate) use run::run;
