mod common;

use common::*;
use mat5_reader::{
    ArrayData, Endianness, MatError, MatFile, MatrixClass, MatrixData, NumericData, ReadOptions,
    SparseMatrix,
};

const LE: Endianness = Endianness::Little;

fn load(elements: &[Vec<u8>]) -> MatFile {
    MatFile::from_bytes(&document(LE, elements)).expect("document")
}

fn load_err(elements: &[Vec<u8>]) -> MatError {
    MatFile::from_bytes(&document(LE, elements)).expect_err("document must fail")
}

#[test]
fn double_matrix_keeps_name_dimensions_and_values() {
    let mat = load(&[double_matrix(LE, "x", &[2, 3], &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0])]);
    let array = mat.get("x").expect("variable x");
    assert_eq!(array.name, "x");
    let m = array.as_matrix().expect("matrix");
    assert_eq!(m.class(), MatrixClass::Double);
    assert_eq!(m.dimensions, vec![2, 3]);
    assert_eq!(m.total_elements(), 6);
    assert!(!m.is_complex() && !m.is_global() && !m.is_logical());
    assert_eq!(
        array.as_numeric(),
        Some(&NumericData::Double(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]))
    );
}

#[test]
fn narrow_storage_is_widened_to_the_class_type() {
    let mat = load(&[matrix(
        LE,
        &[
            flags(LE, CLASS_DOUBLE, 0, 0),
            dims(LE, &[1, 3]),
            name(LE, "w"),
            numeric::<u8>(LE, &[1, 2, 200]),
        ],
    )]);
    assert_eq!(
        mat.get("w").and_then(|a| a.as_numeric()),
        Some(&NumericData::Double(vec![1.0, 2.0, 200.0]))
    );
}

#[test]
fn value_that_does_not_fit_the_class_type_fails() {
    let err = load_err(&[matrix(
        LE,
        &[
            flags(LE, CLASS_INT8, 0, 0),
            dims(LE, &[1, 1]),
            name(LE, "n"),
            numeric::<u8>(LE, &[200]),
        ],
    )]);
    assert!(
        matches!(err, MatError::NumericConversion { from: "uint8", to: "int8", .. }),
        "unexpected error {:?}",
        err
    );

    let mat = load(&[matrix(
        LE,
        &[
            flags(LE, CLASS_INT8, 0, 0),
            dims(LE, &[1, 1]),
            name(LE, "n"),
            small_numeric::<u8>(LE, &[100]),
        ],
    )]);
    assert_eq!(mat.get("n").and_then(|a| a.as_numeric()), Some(&NumericData::Int8(vec![100])));
}

#[test]
fn complex_matrix_reads_imaginary_part() {
    let mat = load(&[matrix(
        LE,
        &[
            flags(LE, CLASS_DOUBLE, FLAG_COMPLEX | FLAG_GLOBAL, 0),
            dims(LE, &[1, 2]),
            name(LE, "z"),
            numeric::<f64>(LE, &[1.0, 2.0]),
            numeric::<i16>(LE, &[-3, 4]),
        ],
    )]);
    let m = mat.get("z").and_then(|a| a.as_matrix()).expect("matrix z");
    assert!(m.is_complex());
    assert!(m.is_global());
    match &m.data {
        MatrixData::Numeric(n) => {
            assert_eq!(n.real, NumericData::Double(vec![1.0, 2.0]));
            assert_eq!(n.imag, Some(NumericData::Double(vec![-3.0, 4.0])));
        }
        other => panic!("expected numeric data, got {:?}", other),
    }
}

#[test]
fn element_count_must_match_dimensions() {
    let err = load_err(&[double_matrix(LE, "bad", &[2, 2], &[1.0, 2.0, 3.0])]);
    assert!(
        matches!(err, MatError::SizeMismatch { expected: 4, found: 3, .. }),
        "unexpected error {:?}",
        err
    );
}

#[test]
fn array_flags_must_be_two_uint32_words() {
    let err = load_err(&[matrix(
        LE,
        &[numeric::<u32>(LE, &[CLASS_DOUBLE as u32, 0, 0]), dims(LE, &[1, 1]), name(LE, "f")],
    )]);
    assert!(matches!(err, MatError::Tag { .. }), "unexpected error {:?}", err);

    let err = load_err(&[matrix(
        LE,
        &[numeric::<i32>(LE, &[CLASS_DOUBLE as i32, 0]), dims(LE, &[1, 1]), name(LE, "f")],
    )]);
    assert!(matches!(err, MatError::Tag { .. }), "unexpected error {:?}", err);
}

#[test]
fn class_code_outside_1_to_18_is_a_tag_error() {
    for code in [0u8, 19, 255] {
        let err = load_err(&[matrix(LE, &[flags(LE, code, 0, 0), dims(LE, &[1, 1]), name(LE, "c")])]);
        assert!(matches!(err, MatError::Tag { .. }), "code {}: unexpected error {:?}", code, err);
    }
}

#[test]
fn struct_class_is_unsupported_regardless_of_contents() {
    // Nothing after the flags is valid, so the class check must come first.
    let err = load_err(&[matrix(
        LE,
        &[flags(LE, CLASS_STRUCT, 0, 0), raw_element(LE, 99, &[0xFF; 16])],
    )]);
    assert!(
        matches!(err, MatError::UnsupportedMatrixClass { class: MatrixClass::Struct, .. }),
        "unexpected error {:?}",
        err
    );
    assert_eq!(err.to_string(), "Unsupported matrix class Struct (code 2) at offset 0x80");

    for (code, class) in [
        (CLASS_OBJECT, MatrixClass::Object),
        (CLASS_FUNCTION, MatrixClass::FunctionHandle),
        (18, MatrixClass::LittleEndianPacked),
    ] {
        let err = load_err(&[matrix(LE, &[flags(LE, code, 0, 0), dims(LE, &[1, 1]), name(LE, "u")])]);
        match err {
            MatError::UnsupportedMatrixClass { class: found, .. } => {
                assert_eq!(found, class);
                assert_eq!(found.code(), code);
            }
            other => panic!("class {}: unexpected error {:?}", code, other),
        }
    }
}

#[test]
fn sparse_matrix_scenario() {
    let mat = load(&[matrix(
        LE,
        &[
            flags(LE, CLASS_SPARSE, 0, 2),
            dims(LE, &[2, 2]),
            name(LE, "sp"),
            numeric::<i32>(LE, &[0, 1]),
            numeric::<i32>(LE, &[0, 1, 2]),
            numeric::<f64>(LE, &[1.0, 2.0]),
        ],
    )]);
    let m = mat.get("sp").and_then(|a| a.as_matrix()).expect("matrix sp");
    assert_eq!(m.flags.nzmax, 2);
    let sparse = match &m.data {
        MatrixData::Sparse(s) => s,
        other => panic!("expected sparse data, got {:?}", other),
    };
    assert_eq!((sparse.rows, sparse.cols, sparse.nnz()), (2, 2, 2));
    assert_eq!(sparse.get(0, 0), Some(1.0));
    assert_eq!(sparse.get(1, 1), Some(2.0));
    assert_eq!(sparse.get(0, 1), Some(0.0));
    assert_eq!(sparse.get(1, 0), Some(0.0));
    assert_eq!(sparse.get(2, 0), None);
    assert_eq!(sparse.to_dense(), Some(vec![1.0, 0.0, 0.0, 2.0]));
    assert_eq!(sparse.iter().collect::<Vec<_>>(), vec![(0, 0, 1.0), (1, 1, 2.0)]);
    assert!(sparse.imag.is_none());
}

#[test]
fn dense_view_of_a_huge_sparse_matrix_is_refused() {
    let empty = SparseMatrix {
        rows: i32::MAX as usize,
        cols: i32::MAX as usize,
        row_indices: Vec::new(),
        column_pointers: Vec::new(),
        real: NumericData::Double(Vec::new()),
        imag: None,
    };
    assert_eq!(empty.nnz(), 0);
    assert_eq!(empty.get(5, 5), None);
    assert_eq!(empty.to_dense(), None);

    let tiny = SparseMatrix {
        rows: 0,
        cols: 3,
        ..empty
    };
    assert_eq!(tiny.to_dense(), Some(Vec::new()));
}

#[test]
fn sparse_values_keep_their_stored_type() {
    let mat = load(&[matrix(
        LE,
        &[
            flags(LE, CLASS_SPARSE, FLAG_LOGICAL | FLAG_COMPLEX, 1),
            dims(LE, &[3, 1]),
            name(LE, "lg"),
            small_numeric::<i32>(LE, &[2]),
            numeric::<i32>(LE, &[0, 1]),
            small_numeric::<u8>(LE, &[1]),
            small_numeric::<u8>(LE, &[5]),
        ],
    )]);
    let m = mat.get("lg").and_then(|a| a.as_matrix()).expect("matrix lg");
    assert!(m.is_logical());
    match &m.data {
        MatrixData::Sparse(s) => {
            assert_eq!(s.real, NumericData::UInt8(vec![1]));
            assert_eq!(s.imag, Some(NumericData::UInt8(vec![5])));
            assert_eq!(s.get(2, 0), Some(1.0));
        }
        other => panic!("expected sparse data, got {:?}", other),
    }
}

#[test]
fn sparse_column_pointer_count_must_match_columns() {
    let err = load_err(&[matrix(
        LE,
        &[
            flags(LE, CLASS_SPARSE, 0, 2),
            dims(LE, &[2, 2]),
            name(LE, "sp"),
            numeric::<i32>(LE, &[0, 1]),
            numeric::<i32>(LE, &[0, 2]),
            numeric::<f64>(LE, &[1.0, 2.0]),
        ],
    )]);
    assert!(matches!(err, MatError::SizeMismatch { .. }), "unexpected error {:?}", err);
}

#[test]
fn cell_reads_exactly_total_elements() {
    let mat = load(&[
        matrix(
            LE,
            &[
                flags(LE, CLASS_CELL, 0, 0),
                dims(LE, &[1, 2]),
                name(LE, "c"),
                double_matrix(LE, "", &[1, 1], &[1.0]),
                matrix(
                    LE,
                    &[flags(LE, CLASS_CHAR, 0, 0), dims(LE, &[1, 2]), name(LE, ""), numeric::<u16>(LE, &[104, 105])],
                ),
            ],
        ),
        double_matrix(LE, "", &[1, 1], &[3.0]),
    ]);

    assert_eq!(mat.len(), 2, "stray element must become its own variable");
    let m = mat.get("c").and_then(|a| a.as_matrix()).expect("cell c");
    assert_eq!(m.total_elements(), 2);
    let cell = match &m.data {
        MatrixData::Cell(c) => c,
        other => panic!("expected cell data, got {:?}", other),
    };
    assert_eq!(cell.len(), 2);
    assert_eq!(cell.get(&[0, 0]).and_then(|a| a.as_numeric()), Some(&NumericData::Double(vec![1.0])));
    let text = cell.get(&[0, 1]).and_then(|a| a.as_matrix()).and_then(|m| m.as_string());
    assert_eq!(text.as_deref(), Some("hi"));
    assert!(cell.get(&[1, 0]).is_none());
    assert!(cell.get(&[0]).is_none());

    assert_eq!(
        mat.get("Unnamed 1").and_then(|a| a.as_numeric()),
        Some(&NumericData::Double(vec![3.0]))
    );
}

#[test]
fn cell_entries_may_be_empty_or_nested() {
    let inner = matrix(
        LE,
        &[flags(LE, CLASS_CELL, 0, 0), dims(LE, &[1, 1]), name(LE, ""), matrix(LE, &[])],
    );
    let mat = load(&[matrix(
        LE,
        &[flags(LE, CLASS_CELL, 0, 0), dims(LE, &[2, 1]), name(LE, "outer"), inner, matrix(LE, &[])],
    )]);
    let outer = match &mat.get("outer").and_then(|a| a.as_matrix()).expect("outer").data {
        MatrixData::Cell(c) => c.clone(),
        other => panic!("expected cell data, got {:?}", other),
    };
    assert_eq!(outer.len(), 2);
    let empty = outer.get(&[1, 0]).and_then(|a| a.as_matrix()).expect("empty matrix");
    assert_eq!(empty.dimensions, vec![0, 0]);
    assert_eq!(empty.total_elements(), 0);
    match &outer.elements[0].as_matrix().expect("inner cell").data {
        MatrixData::Cell(c) => assert_eq!(c.len(), 1),
        other => panic!("expected nested cell, got {:?}", other),
    }
}

#[test]
fn nesting_deeper_than_the_limit_fails() {
    let leaf = double_matrix(LE, "", &[1, 1], &[1.0]);
    let inner = matrix(LE, &[flags(LE, CLASS_CELL, 0, 0), dims(LE, &[1, 1]), name(LE, ""), leaf]);
    let outer = matrix(LE, &[flags(LE, CLASS_CELL, 0, 0), dims(LE, &[1, 1]), name(LE, "deep"), inner]);
    let doc = document(LE, &[outer]);

    let err = MatFile::from_reader_with_options(std::io::Cursor::new(&doc), ReadOptions::new().max_depth(2))
        .expect_err("three levels exceed a limit of two");
    assert!(matches!(err, MatError::NestingTooDeep { limit: 2, .. }), "unexpected error {:?}", err);

    let mat = MatFile::from_reader_with_options(std::io::Cursor::new(&doc), ReadOptions::new().max_depth(3))
        .expect("three levels fit a limit of three");
    assert!(mat.contains("deep"));
}

#[test]
fn char_matrix_accepts_utf16_units_and_utf8_text() {
    let mat = load(&[
        matrix(
            LE,
            &[
                flags(LE, CLASS_CHAR, 0, 0),
                dims(LE, &[1, 5]),
                name(LE, "s"),
                numeric::<u16>(LE, &"hello".encode_utf16().collect::<Vec<_>>()),
            ],
        ),
        matrix(
            LE,
            &[
                flags(LE, CLASS_CHAR, 0, 0),
                dims(LE, &[1, 4]),
                name(LE, "t"),
                raw_element(LE, MI_UTF8, "café".as_bytes()),
            ],
        ),
    ]);
    let s = mat.get("s").and_then(|a| a.as_matrix()).expect("s");
    assert_eq!(s.as_string().as_deref(), Some("hello"));
    let t = mat.get("t").and_then(|a| a.as_matrix()).expect("t");
    assert_eq!(t.as_string().as_deref(), Some("café"));
    assert_eq!(mat.get("t").and_then(|a| a.as_numeric()).map(|n| n.len()), Some(4));
}

#[test]
fn opaque_class_reads_two_names_and_one_array() {
    let mat = load(&[matrix(
        LE,
        &[
            flags(LE, CLASS_OPAQUE, 0, 0),
            name(LE, "obj"),
            name(LE, "MCOS"),
            name(LE, "string"),
            numeric::<u32>(LE, &[0xDD00_0000, 2, 1, 1]),
        ],
    )]);
    let array = mat.get("obj").expect("opaque object");
    assert_eq!(array.kind_name(), "opaque object");
    let m = array.as_matrix().expect("matrix");
    assert_eq!(m.class(), MatrixClass::Opaque);
    assert!(m.dimensions.is_empty());
    assert_eq!(m.total_elements(), 0);
    match &m.data {
        MatrixData::Opaque(o) => {
            assert_eq!(o.type_system, "MCOS");
            assert_eq!(o.class_name, "string");
            assert_eq!(
                o.data.data,
                ArrayData::Primitive(NumericData::UInt32(vec![0xDD00_0000, 2, 1, 1]))
            );
        }
        other => panic!("expected opaque data, got {:?}", other),
    }
}

#[test]
fn subelements_cannot_overrun_the_declared_matrix_length() {
    // Declare the matrix 8 bytes shorter than its contents.
    let mut element = double_matrix(LE, "x", &[1, 1], &[1.0]);
    let declared = (element.len() - 16) as u32;
    element[4..8].copy_from_slice(&declared.to_le_bytes());
    let err = load_err(&[element]);
    assert!(matches!(err, MatError::TruncatedStream { .. }), "unexpected error {:?}", err);
}

#[test]
fn unread_bytes_inside_a_matrix_are_skipped() {
    let mut body = [
        flags(LE, CLASS_DOUBLE, 0, 0),
        dims(LE, &[1, 1]),
        name(LE, "x"),
        numeric::<f64>(LE, &[4.0]),
    ]
    .concat();
    body.extend_from_slice(&[0xEE; 8]);
    let mat = load(&[raw_element(LE, MI_MATRIX, &body), double_matrix(LE, "y", &[1, 1], &[5.0])]);
    assert_eq!(mat.get("x").and_then(|a| a.as_numeric()), Some(&NumericData::Double(vec![4.0])));
    assert_eq!(mat.get("y").and_then(|a| a.as_numeric()), Some(&NumericData::Double(vec![5.0])));
}

#[test]
fn uint8_logical_matrix_keeps_flag() {
    let mat = load(&[matrix(
        LE,
        &[
            flags(LE, CLASS_UINT8, FLAG_LOGICAL, 0),
            dims(LE, &[1, 3]),
            name(LE, "mask"),
            small_numeric::<u8>(LE, &[1, 0, 1]),
        ],
    )]);
    let m = mat.get("mask").and_then(|a| a.as_matrix()).expect("mask");
    assert!(m.is_logical());
    assert_eq!(m.class(), MatrixClass::UInt8);
    assert_eq!(mat.get("mask").and_then(|a| a.as_numeric()), Some(&NumericData::UInt8(vec![1, 0, 1])));
}

#[test]
fn negative_dimensions_are_rejected() {
    let err = load_err(&[double_matrix(LE, "neg", &[-1, 2], &[])]);
    assert!(matches!(err, MatError::Tag { .. }), "unexpected error {:?}", err);
}

#[test]
fn int32_dimensions_may_be_stored_narrower() {
    let mat = load(&[matrix(
        LE,
        &[
            flags(LE, CLASS_INT32, 0, 0),
            small_numeric::<u8>(LE, &[1, 2]),
            name(LE, "i"),
            numeric::<i32>(LE, &[-5, 5]),
        ],
    )]);
    let m = mat.get("i").and_then(|a| a.as_matrix()).expect("i");
    assert_eq!(m.dimensions, vec![1, 2]);
    assert_eq!(mat.get("i").and_then(|a| a.as_numeric()), Some(&NumericData::Int32(vec![-5, 5])));
}
