mod ledger;
mod money;
mod register;

pub use ledger::*;
pub use money::*;
pub use register::*;
