pub mod bounded_spsc;
