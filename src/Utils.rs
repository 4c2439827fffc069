//! different utility modules used throughout the project
/// side by side table of the solutions (tabled)
pub mod comparison_table;
/// logger initialization and saving solutions into csv
pub mod logger;
/// plot all solutions on one chart (plotters)
pub mod plots;
/// parse document with structure like
/// " title1 key1: value1, value2 key2: value2 title2 key3:value3, value4" into HashMap
pub mod task_parser;
