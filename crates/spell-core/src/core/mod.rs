pub mod rng;
pub mod storage;
pub mod time;
pub mod words;
