use std::env;
use std::path::PathBuf;

// Standard Arrow C Data Interface structs, plus aliases for the Rust names
// used in exported signatures.
const C_DATA_INTERFACE: &str = r#"
#ifndef ARROW_C_DATA_INTERFACE
#define ARROW_C_DATA_INTERFACE

#define ARROW_FLAG_DICTIONARY_ORDERED 1
#define ARROW_FLAG_NULLABLE 2
#define ARROW_FLAG_MAP_KEYS_SORTED 4

struct ArrowSchema {
  const char* format;
  const char* name;
  const char* metadata;
  int64_t flags;
  int64_t n_children;
  struct ArrowSchema** children;
  struct ArrowSchema* dictionary;
  void (*release)(struct ArrowSchema*);
  void* private_data;
};

struct ArrowArray {
  int64_t length;
  int64_t null_count;
  int64_t offset;
  int64_t n_buffers;
  int64_t n_children;
  const void** buffers;
  struct ArrowArray** children;
  struct ArrowArray* dictionary;
  void (*release)(struct ArrowArray*);
  void* private_data;
};

#endif  /* ARROW_C_DATA_INTERFACE */

typedef struct ArrowArray FFI_ArrowArray;
typedef struct ArrowSchema FFI_ArrowSchema;
"#;

const SOURCES: &[&str] = &[
    "src/lib.rs",
    "src/data_type.rs",
    "src/schema.rs",
    "src/array.rs",
    "src/table.rs",
];

fn main() {
    let crate_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap());
    let out_dir = crate_dir.join("include").join("arrow_glue");

    // Create include directory if it doesn't exist
    std::fs::create_dir_all(&out_dir).expect("Unable to create include directory");

    cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_language(cbindgen::Language::C)
        .with_header("/* Arrow Glue C Header - Auto-generated */")
        .with_include_guard("ARROW_GLUE_H")
        .with_after_include(C_DATA_INTERFACE)
        .with_cpp_compat(true)
        .generate()
        .expect("Unable to generate bindings")
        .write_to_file(out_dir.join("arrow_glue.h"));

    for source in SOURCES {
        println!("cargo:rerun-if-changed={}", source);
    }
}
