pub mod kicad;
pub mod kicad_project;
pub mod kicad_sexpr;
