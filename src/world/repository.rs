use crate::core::serialization::SaveState;

pub trait ProgressionRepository {
    fn load_or_init(&mut self) -> Result<SaveState, Box<dyn std::error::Error>>;
    fn save_state(&mut self, state: &SaveState) -> Result<(), Box<dyn std::error::Error>>;
}
