//! Grammars: CFGs with their normal forms, extended CFGs and recursive
//! state machines.

pub mod cfg;
pub mod ecfg;
pub mod normal;
pub mod rsm;

pub use self::cfg::{Cfg, Production, Symbol};
pub use self::ecfg::Ecfg;
pub use self::normal::{to_cnf, to_wcnf};
pub use self::rsm::{Rsm, minimize_rsm};
