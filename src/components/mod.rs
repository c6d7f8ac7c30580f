pub mod letters;
pub mod sankey;
