//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities mirror the backend tables one to one.
//! Each entity has a Model struct for data and an Entity struct for operations.

use sea_orm::EntityTrait;

pub mod assignment;
pub mod attendance;
pub mod class;
pub mod expense;
pub mod fee_record;
pub mod fee_type;
pub mod operator;
pub mod owner_profile;
pub mod salary_record;
pub mod staff;
pub mod student;
pub mod subject;

// Re-export specific types to avoid conflicts
pub use assignment::{Entity as Assignment, Model as AssignmentModel};
pub use attendance::{Entity as Attendance, Model as AttendanceModel};
pub use class::{Entity as Class, Model as ClassModel};
pub use expense::{Entity as Expense, Model as ExpenseModel};
pub use fee_record::{Entity as FeeRecord, Model as FeeRecordModel};
pub use fee_type::{Entity as FeeType, Model as FeeTypeModel};
pub use operator::{Entity as Operator, Model as OperatorModel};
pub use owner_profile::{Entity as OwnerProfile, Model as OwnerProfileModel};
pub use salary_record::{Entity as SalaryRecord, Model as SalaryRecordModel};
pub use staff::{Entity as Staff, Model as StaffModel};
pub use student::{Entity as Student, Model as StudentModel};
pub use subject::{Entity as Subject, Model as SubjectModel};

/// Tables whose rows belong to one school account.
///
/// Writes through the mutation gateway only ever touch rows whose owner
/// column matches the acting account.
pub trait Owned: EntityTrait {
    /// Singular name used in not-found errors
    const NAME: &'static str;

    /// Column holding the owning account's uid
    fn owner_column() -> Self::Column;
}
