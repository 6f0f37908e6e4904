//! Physical parameterisations shared by transport, microphysics and EPM.

pub mod thermo;
