//! Path — патрульные маршруты агентов
//!
//! - waypoint: действия на точках маршрута и PathConfig
//! - scan: порядок осмотра по дуге
//! - follower: state machine прохождения маршрута (тикается агентом)
//!
//! Своих систем нет: PathFollower тикает agent orchestrator в FixedUpdate.

pub mod follower;
pub mod scan;
pub mod waypoint;


pub use follower::{PathActivity, PathAgent, PathEvent, PathFollower, PathStatus};
pub use scan::{scan_directions, ScanOrder};
pub use waypoint::{PathConfig, Waypoint, WaypointAction};
