pub mod event_writer;
pub mod input_reader;
