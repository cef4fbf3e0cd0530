mod common;

use serial_test::serial;

use heap_db::{
    execution::OpIterator,
    storage::HeapFileIterator,
    utils::HandyRwLock,
    BufferPool, Database, DbError, HeapPageId, Transaction, Tuple,
};

use crate::common::{empty_table, insert_row, random_table, scan_tuples, setup};

/// Writing a page and re-reading it yields an identical byte image.
#[test]
#[serial]
fn test_write_read_round_trip() {
    setup();

    let table_rc = random_table(2, 3);
    let table_id = table_rc.rl().get_id();
    let pid = HeapPageId::new(table_id, 0);

    let table = table_rc.rl();
    let page = table.read_page(&pid).unwrap();
    let image = page.get_page_data();

    table.write_page(&page).unwrap();
    let reread = table.read_page(&pid).unwrap();
    assert_eq!(reread.get_page_data(), image);
}

/// The file grows one zero page at a time as pages fill up.
#[test]
#[serial]
fn test_insert_appends_pages() {
    setup();
    BufferPool::set_page_size(64);
    Database::reset_buffer_pool(50);

    let table_rc = empty_table(2);
    let table_id = table_rc.rl().get_id();
    assert_eq!(table_rc.rl().num_pages().unwrap(), 0);

    let tx = Transaction::new();
    insert_row(&tx, table_id, 0, 2);
    assert_eq!(table_rc.rl().num_pages().unwrap(), 1);

    // three slots per page at this page size
    for v in 1..4 {
        insert_row(&tx, table_id, v, 2);
    }
    assert_eq!(table_rc.rl().num_pages().unwrap(), 2);
    tx.commit().unwrap();

    let tx2 = Transaction::new();
    assert_eq!(scan_tuples(&tx2, table_id).len(), 4);
    tx2.commit().unwrap();
}

/// Reads at or past the page count are refused.
#[test]
#[serial]
fn test_read_page_out_of_range() {
    setup();

    let table_rc = empty_table(2);
    let table = table_rc.rl();

    assert!(matches!(
        table.read_page(&HeapPageId::new(table.get_id(), 0)),
        Err(DbError::InvalidPage(_))
    ));

    drop(table);
    let tx = Transaction::new();
    let table_id = table_rc.rl().get_id();
    insert_row(&tx, table_id, 1, 2);
    tx.commit().unwrap();

    let table = table_rc.rl();
    assert!(table.read_page(&HeapPageId::new(table_id, 0)).is_ok());
    // one past the end, exactly at num_pages
    assert!(matches!(
        table.read_page(&HeapPageId::new(table_id, 1)),
        Err(DbError::InvalidPage(_))
    ));
}

/// Tables resolve through the catalog by id and by name.
#[test]
#[serial]
fn test_catalog_lookup() {
    setup();

    let table_rc = empty_table(2);
    let table_id = table_rc.rl().get_id();
    let name = format!("table_{}", table_id);

    let catalog = Database::catalog();
    assert_eq!(catalog.get_table(table_id).unwrap().rl().get_id(), table_id);
    assert_eq!(
        catalog.get_table_by_name(&name).unwrap().rl().get_id(),
        table_id
    );
    assert_eq!(catalog.get_schema(table_id).unwrap(), table_rc.rl().get_schema());
    assert!(matches!(
        catalog.get_table_by_name("nope"),
        Err(DbError::NoSuchElement(_))
    ));
    assert!(matches!(
        catalog.get_table(table_id.wrapping_add(1)),
        Err(DbError::NoSuchElement(_))
    ));
}

/// A tuple whose schema differs from the table's is rejected.
#[test]
#[serial]
fn test_insert_schema_mismatch() {
    setup();

    let table_rc = empty_table(2);
    let tx = Transaction::new();

    let wrong = Tuple::new_int_tuples(5, 3);
    let err = table_rc.rl().insert_tuple(&tx, &wrong).unwrap_err();
    assert!(matches!(err, DbError::Db(_)));
    tx.commit().unwrap();
}

/// The scan honors the operator protocol: idempotent has_next,
/// NoSuchElement past the end, rewind restarting from page 0.
#[test]
#[serial]
fn test_iterator_protocol() {
    setup();
    BufferPool::set_page_size(64);
    Database::reset_buffer_pool(50);

    let table_rc = empty_table(2);
    let table_id = table_rc.rl().get_id();

    let tx = Transaction::new();
    for v in 0..7 {
        insert_row(&tx, table_id, v, 2);
    }
    tx.commit().unwrap();
    assert!(table_rc.rl().num_pages().unwrap() > 1);

    let tx2 = Transaction::new();
    let mut iter = HeapFileIterator::new(&tx2, table_id).unwrap();
    iter.open().unwrap();

    assert!(iter.has_next().unwrap());
    assert!(iter.has_next().unwrap());

    let mut seen = Vec::new();
    while iter.has_next().unwrap() {
        seen.push(iter.next().unwrap().get_cell(0));
    }
    assert_eq!(seen.len(), 7);
    assert!(matches!(iter.next(), Err(DbError::NoSuchElement(_))));

    iter.rewind().unwrap();
    let mut replay = Vec::new();
    while iter.has_next().unwrap() {
        replay.push(iter.next().unwrap().get_cell(0));
    }
    assert_eq!(replay, seen);

    iter.close();
    assert!(!iter.has_next().unwrap());
    tx2.commit().unwrap();
}

/// Scan results carry record ids that point back at their slots.
#[test]
#[serial]
fn test_scan_assigns_record_ids() {
    setup();

    let table_rc = random_table(2, 3);
    let table_id = table_rc.rl().get_id();

    let tx = Transaction::new();
    let tuples = scan_tuples(&tx, table_id);
    for tuple in &tuples {
        let rid = tuple.get_rid().unwrap();
        assert_eq!(rid.pid.table_id, table_id);
        let direct = table_rc.rl().read_page(&rid.pid).unwrap();
        assert_eq!(direct.tuple_at(rid.slot).unwrap().get_cells(), tuple.get_cells());
    }
    tx.commit().unwrap();
}

/// An empty table scans as empty without touching any page.
#[test]
#[serial]
fn test_scan_empty_table() {
    setup();

    let table_rc = empty_table(2);
    let table_id = table_rc.rl().get_id();

    let tx = Transaction::new();
    let mut iter = HeapFileIterator::new(&tx, table_id).unwrap();
    iter.open().unwrap();
    assert!(!iter.has_next().unwrap());
    assert!(matches!(iter.next(), Err(DbError::NoSuchElement(_))));
    tx.commit().unwrap();
}

/// Deleting through the buffer pool removes exactly the chosen tuple.
#[test]
#[serial]
fn test_delete_tuple() {
    setup();

    let table_rc = random_table(2, 5);
    let table_id = table_rc.rl().get_id();

    let tx = Transaction::new();
    let tuples = scan_tuples(&tx, table_id);
    let victim = tuples[2].clone();
    Database::buffer_pool().delete_tuple(&tx, &victim).unwrap();
    tx.commit().unwrap();

    let tx2 = Transaction::new();
    let remaining = scan_tuples(&tx2, table_id);
    assert_eq!(remaining.len(), 4);
    assert!(!remaining
        .iter()
        .any(|t| t.get_rid() == victim.get_rid()));
    tx2.commit().unwrap();
}
