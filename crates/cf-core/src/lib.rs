pub mod block;
pub mod error;
pub mod ids;
pub mod normalize;
mod rng;
pub mod structure;
pub mod tag;
pub mod traverse;
pub mod value;

pub use block::*;
pub use error::FlowError;
pub use ids::{add_unique_ids, all_blocks_have_ids, generate_id, IdGenerator};
pub use normalize::{
    flatten_anonymous_scripts, is_valid_script_block, normalize_structure, normalize_tree,
};
pub use structure::{check_insertable, check_structure};
pub use tag::CommandTag;
pub use traverse::{
    ancestors_of, collect_all_blocks, contains_block, count_blocks, count_blocks_by_type,
    find_block_by_id, find_block_by_id_mut, insert_block, path_to, remove_block_by_id,
    resolve_path, resolve_path_mut, walk, Visit,
};
pub use value::*;
