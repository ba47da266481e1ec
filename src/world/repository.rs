use crate::core::serialization::SaveState;

/// Storage backend for durable saves. The engine itself only ever needs the
/// two whole-state operations.
pub trait SaveRepository {
    fn load(&mut self) -> Result<Option<SaveState>, Box<dyn std::error::Error>>;
    fn save(&mut self, state: &SaveState) -> Result<(), Box<dyn std::error::Error>>;
}
