pub mod exponents;
pub mod functions;
pub mod logarithms;
pub mod trigonometry;
