pub mod appointments;
