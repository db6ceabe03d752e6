//! The type-map/DDL half of the Inspector component: `map_type` and
//! `render_create_table`. Schema introspection itself lives
//! in `schema-describer`, which this crate depends on for the `TableSchema`
//! it renders.

mod render;
mod type_map;

pub use render::render_create_table;
pub use type_map::map_type;
