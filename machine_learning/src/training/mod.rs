mod trainer;

pub use trainer::{PerceptronTrainer, train};
