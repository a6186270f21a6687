//! Concrete implementations of the external collaborators named in
//! spec section 1c: day-ahead price, hydrogen price, and PPA
//! availability loaders. None of these are part of the Dispatch
//! Optimizer's contract — the core only consumes the tabular shape they
//! produce — but a runnable repository needs something that produces it.

pub mod da_price;
pub mod h2_price;
pub mod ppa;
