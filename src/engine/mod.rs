pub mod choices;
pub mod practice;
pub mod selector;
pub mod session;
