//! # Problems shared by the unit tests
//!
//! Each module builds one small problem through `create`. Sequences are numbered with the row
//! logicals first, so in a problem with `m` rows, column `j` is sequence `m + j`.
