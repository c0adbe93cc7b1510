pub mod a001_inventory_record;
