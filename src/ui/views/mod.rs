mod catalog_list;
mod item_detail;

pub use catalog_list::CatalogListView;
pub use item_detail::ItemDetailView;
