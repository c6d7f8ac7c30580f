mod component;
pub mod config;
pub mod data;
pub mod layout;
mod render;
mod types;

pub use component::SankeyChart;
pub use config::{LinkColor, Margins, NodeAlign, SankeyConfig, format_number};
pub use layout::{ColumnLayout, FlowLayout, LayoutParams};
pub use render::{SankeyDiagram, link_path, render_sankey, uid};
pub use types::{FlowGraph, FlowLink, FlowNode, FlowRecord};
