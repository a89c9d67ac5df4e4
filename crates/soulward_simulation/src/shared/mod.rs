//! Shared — cross-cutting хелперы
//!
//! - timer: обратный/прямой отсчёт с допуском на накопление float ошибки
//! - geometry: плоскость ходьбы, удаление компоненты скорости, проверки направлений

pub mod geometry;
pub mod timer;

pub use geometry::*;
pub use timer::*;
