//! Catalog queries behind the introspector. Kept as named constants so
//! error reports can carry the exact SQL that failed.

pub(crate) const TABLES_QUERY: &str = r#"
SELECT
  n.nspname AS table_schema,
  c.relname AS table_name,
  c.relkind::text AS relkind,
  c.relpersistence::text AS persistence,
  c.relispartition AS is_partition,
  CASE
    WHEN c.relkind = 'p' THEN pg_catalog.pg_get_partkeydef(c.oid)
    ELSE NULL
  END AS partition_key,
  pg_catalog.pg_get_expr(c.relpartbound, c.oid) AS partition_bound,
  parent_ns.nspname AS parent_schema,
  parent.relname AS parent_name,
  am.amname AS access_method,
  ts.spcname AS tablespace_name,
  c.reloptions AS storage_options
FROM pg_catalog.pg_class c
INNER JOIN pg_catalog.pg_namespace n ON c.relnamespace = n.oid
LEFT JOIN pg_catalog.pg_am am ON c.relam = am.oid
LEFT JOIN pg_catalog.pg_tablespace ts ON c.reltablespace = ts.oid
LEFT JOIN pg_catalog.pg_inherits i
  ON c.relispartition AND c.oid = i.inhrelid
LEFT JOIN pg_catalog.pg_class parent ON i.inhparent = parent.oid
LEFT JOIN pg_catalog.pg_namespace parent_ns ON parent.relnamespace = parent_ns.oid
WHERE n.nspname NOT IN ('information_schema', 'pg_catalog', 'pg_toast')
  AND c.relkind IN ('r', 'p')
ORDER BY n.nspname ASC, c.relname ASC;
"#;

pub(crate) const TABLE_COLUMNS_QUERY: &str = r#"
SELECT
  a.attname AS column_name,
  pg_catalog.format_type(a.atttypid, a.atttypmod) AS data_type,
  a.attnotnull AS not_null,
  pg_catalog.pg_get_expr(ad.adbin, ad.adrelid) AS default_expr,
  a.attidentity::text AS identity_kind,
  a.attgenerated::text AS generated_kind,
  a.attstorage::text AS column_storage,
  t.typstorage::text AS type_storage,
  a.attcompression::text AS compression,
  CASE
    WHEN a.attcollation <> 0 AND a.attcollation <> t.typcollation THEN col.collname
    ELSE NULL
  END AS collation_name
FROM pg_catalog.pg_attribute a
INNER JOIN pg_catalog.pg_class c ON c.oid = a.attrelid
INNER JOIN pg_catalog.pg_namespace n ON c.relnamespace = n.oid
INNER JOIN pg_catalog.pg_type t ON t.oid = a.atttypid
LEFT JOIN pg_catalog.pg_attrdef ad ON ad.adrelid = a.attrelid AND ad.adnum = a.attnum
LEFT JOIN pg_catalog.pg_collation col ON col.oid = a.attcollation
WHERE n.nspname = $1
  AND c.relname = $2
  AND a.attnum > 0
  AND NOT a.attisdropped
ORDER BY a.attnum ASC;
"#;

pub(crate) const TABLE_CONSTRAINTS_QUERY: &str = r#"
SELECT
  con.conname AS constraint_name,
  con.contype::text AS constraint_type,
  pg_catalog.pg_get_constraintdef(con.oid) AS definition,
  con.condeferrable AS deferrable,
  con.condeferred AS initially_deferred,
  con.connoinherit AS no_inherit,
  con.confmatchtype::text AS fk_match,
  con.confupdtype::text AS fk_on_update,
  con.confdeltype::text AS fk_on_delete,
  ref_ns.nspname AS ref_schema,
  ref.relname AS ref_table,
  (
    SELECT array_agg(a.attname ORDER BY k.ord)
    FROM unnest(con.conkey) WITH ORDINALITY AS k(attnum, ord)
    INNER JOIN pg_catalog.pg_attribute a
      ON a.attrelid = con.conrelid AND a.attnum = k.attnum
  ) AS columns,
  (
    SELECT array_agg(a.attname ORDER BY k.ord)
    FROM unnest(con.confkey) WITH ORDINALITY AS k(attnum, ord)
    INNER JOIN pg_catalog.pg_attribute a
      ON a.attrelid = con.confrelid AND a.attnum = k.attnum
  ) AS ref_columns
FROM pg_catalog.pg_constraint con
INNER JOIN pg_catalog.pg_class c ON c.oid = con.conrelid
INNER JOIN pg_catalog.pg_namespace n ON c.relnamespace = n.oid
LEFT JOIN pg_catalog.pg_class ref ON ref.oid = con.confrelid
LEFT JOIN pg_catalog.pg_namespace ref_ns ON ref.relnamespace = ref_ns.oid
WHERE n.nspname = $1
  AND c.relname = $2
  AND con.contype IN ('c', 'u', 'p', 'f', 'x')
ORDER BY con.conname ASC;
"#;

pub(crate) const TABLE_INHERITS_QUERY: &str = r#"
SELECT
  parent_ns.nspname AS parent_schema,
  parent.relname AS parent_name
FROM pg_catalog.pg_inherits i
INNER JOIN pg_catalog.pg_class c ON c.oid = i.inhrelid
INNER JOIN pg_catalog.pg_namespace n ON c.relnamespace = n.oid
INNER JOIN pg_catalog.pg_class parent ON parent.oid = i.inhparent
INNER JOIN pg_catalog.pg_namespace parent_ns ON parent.relnamespace = parent_ns.oid
WHERE n.nspname = $1
  AND c.relname = $2
  AND NOT c.relispartition
ORDER BY i.inhseqno ASC;
"#;

pub(crate) const ENUM_TYPES_QUERY: &str = r#"
SELECT
  n.nspname AS type_schema,
  t.typname AS type_name,
  array_agg(e.enumlabel ORDER BY e.enumsortorder) AS labels
FROM pg_catalog.pg_type t
INNER JOIN pg_catalog.pg_namespace n ON t.typnamespace = n.oid
INNER JOIN pg_catalog.pg_enum e ON e.enumtypid = t.oid
WHERE n.nspname NOT IN ('information_schema', 'pg_catalog', 'pg_toast')
GROUP BY n.nspname, t.typname
ORDER BY n.nspname ASC, t.typname ASC;
"#;

pub(crate) const COMPOSITE_TYPES_QUERY: &str = r#"
SELECT
  n.nspname AS type_schema,
  t.typname AS type_name,
  a.attname AS attr_name,
  pg_catalog.format_type(a.atttypid, a.atttypmod) AS attr_type,
  CASE
    WHEN a.attcollation <> 0 AND a.attcollation <> at.typcollation THEN col.collname
    ELSE NULL
  END AS attr_collation
FROM pg_catalog.pg_type t
INNER JOIN pg_catalog.pg_namespace n ON t.typnamespace = n.oid
INNER JOIN pg_catalog.pg_class c ON c.oid = t.typrelid AND c.relkind = 'c'
INNER JOIN pg_catalog.pg_attribute a ON a.attrelid = c.oid
INNER JOIN pg_catalog.pg_type at ON at.oid = a.atttypid
LEFT JOIN pg_catalog.pg_collation col ON col.oid = a.attcollation
WHERE n.nspname NOT IN ('information_schema', 'pg_catalog', 'pg_toast')
  AND a.attnum > 0
  AND NOT a.attisdropped
ORDER BY n.nspname ASC, t.typname ASC, a.attnum ASC;
"#;

pub(crate) const RANGE_TYPES_QUERY: &str = r#"
SELECT
  n.nspname AS type_schema,
  t.typname AS type_name,
  pg_catalog.format_type(r.rngsubtype, NULL) AS subtype,
  opc.opcname AS subtype_opclass,
  col.collname AS collation_name,
  CASE WHEN r.rngcanonical <> 0 THEN r.rngcanonical::regproc::text ELSE NULL END AS canonical,
  CASE WHEN r.rngsubdiff <> 0 THEN r.rngsubdiff::regproc::text ELSE NULL END AS subtype_diff,
  mt.typname AS multirange_type_name
FROM pg_catalog.pg_range r
INNER JOIN pg_catalog.pg_type t ON t.oid = r.rngtypid
INNER JOIN pg_catalog.pg_namespace n ON t.typnamespace = n.oid
LEFT JOIN pg_catalog.pg_opclass opc ON opc.oid = r.rngsubopc
LEFT JOIN pg_catalog.pg_collation col ON col.oid = r.rngcollation
LEFT JOIN pg_catalog.pg_type mt ON mt.oid = r.rngmultitypid
WHERE n.nspname NOT IN ('information_schema', 'pg_catalog', 'pg_toast')
ORDER BY n.nspname ASC, t.typname ASC;
"#;

pub(crate) const ROUTINES_QUERY: &str = r#"
SELECT
  n.nspname AS routine_schema,
  p.proname AS routine_name,
  p.prokind::text AS routine_kind
FROM pg_catalog.pg_proc p
INNER JOIN pg_catalog.pg_namespace n ON p.pronamespace = n.oid
WHERE n.nspname NOT IN ('information_schema', 'pg_catalog', 'pg_toast')
  AND p.prokind IN ('f', 'p')
ORDER BY n.nspname ASC, p.proname ASC;
"#;
