pub mod broncos;
pub mod erhardt;
pub mod faust;
pub mod glocksee;
pub mod kulturpalast;
pub mod punkrock;
pub mod weltspiele;
