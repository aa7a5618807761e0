use crate::services::scheduling::SchedulingApi;
use crate::services::slot_filling::SlotFillingController;

pub struct AppState {
    pub scheduling: Box<dyn SchedulingApi>,
    pub slot_filling: SlotFillingController,
}
