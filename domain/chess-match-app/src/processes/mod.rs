pub mod turn_clock;
