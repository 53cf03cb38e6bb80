pub mod ctlsat_backend;
pub mod script_solver;
pub mod smtlib_printer;
pub mod spot_backend;
