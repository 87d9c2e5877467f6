pub mod endpoints_table;
pub mod flame_graph;
