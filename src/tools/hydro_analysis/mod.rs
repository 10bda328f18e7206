// private sub-module defined in other files
mod catchment_area;
mod mouth_flow_rate;
mod potential_surface;
mod runoff_risk;
mod section_profile;
mod trace_flowpaths;
mod velocity_field;

// exports identifiers from private sub-modules in the current module namespace
pub use self::catchment_area::CatchmentArea;
pub use self::mouth_flow_rate::MouthFlowRate;
pub use self::potential_surface::PotentialSurface;
pub use self::runoff_risk::RunoffRisk;
pub use self::section_profile::SectionProfile;
pub use self::trace_flowpaths::TraceFlowpaths;
pub use self::velocity_field::VelocityField;
