// level geometry: the tile grid and the swept resolver that keeps actors out of it
pub mod tilemap;
pub mod collision;
