pub mod landcover;
