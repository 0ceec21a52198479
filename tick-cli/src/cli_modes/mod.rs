mod decode_mode;
mod write_mode;

pub use decode_mode::decode_mode;
pub use write_mode::write_mode;

pub enum CliModeResult {
    Finish,
    NothingToDo,
}
