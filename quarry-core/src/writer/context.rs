#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fragment {
    #[default]
    None,
    SqlAlterColumn,
    SqlAlterTable,
    SqlCatalog,
    SqlCreateIndex,
    SqlCreateTable,
    SqlCreateTablePrimaryKey,
    SqlDeleteFrom,
    SqlInsertInto,
    SqlSelect,
    SqlSelectOrderBy,
    SqlSelectWhere,
    SqlUpdate,
    SqlUpdateWhere,
    SqlUpsertInsert,
}

/// State shared by the writer methods while producing one query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Context<'a> {
    pub fragment: Fragment,
    /// Prepended to every table name (and through it to index names).
    pub table_prefix: &'a str,
}

impl<'a> Context<'a> {
    pub fn new(fragment: Fragment, table_prefix: &'a str) -> Self {
        Self {
            fragment,
            table_prefix,
        }
    }
    pub fn switch_fragment(&self, fragment: Fragment) -> Self {
        Self { fragment, ..*self }
    }
    /// Table name as stored in the database.
    pub fn table_name(&self, table: &str) -> String {
        format!("{}{}", self.table_prefix, table)
    }
    /// Index name as stored in the database: `{prefix}{table}_{index}`.
    pub fn index_name(&self, table: &str, index: &str) -> String {
        format!("{}{}_{}", self.table_prefix, table, index)
    }
}

impl Default for Context<'_> {
    fn default() -> Self {
        Context::new(Fragment::None, "")
    }
}
