//! Export module.
//!
//! - Chunks: records to timestamped JSON batches
//! - Orders: orders JSON to dated order tables (xlsx or csv)

pub mod chunks;
pub mod orders;

pub use chunks::{
    chunk_records, export_dir_for, export_json_chunks, export_json_chunks_at, load_json_chunks, ExportBatch,
};
pub use orders::{
    create_output_folder, orders_from_value, orders_table, parse_json_orders, save_orders_to_tables,
    save_orders_to_tables_on,
};
