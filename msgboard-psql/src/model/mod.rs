pub use self::{
    message::Message,
    table_name::{InvalidTableName, TableName},
};

mod message;
mod table_name;
