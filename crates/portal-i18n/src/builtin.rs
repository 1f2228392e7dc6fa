//! Strings shipped with the crate.

pub(crate) const RU: &[(&str, &str)] = &[
    ("OPTIONS.FIO", "Ф.И.О."),
    ("OPTIONS.WORK", "Место работы"),
    ("OPTIONS.WORK_HINT", "Организация или учреждение"),
    ("OPTIONS.POSITION", "Должность"),
    ("OPTIONS.POSITION_HINT", "Занимаемая должность"),
    ("OPTIONS.LAYER_THEME", "Тема слоя"),
    ("OPTIONS.CHRONOLOGY", "Хронология"),
    ("OPTIONS.FILE_TYPE", "Тип файла"),
    ("OPTIONS.FILE", "Файл"),
    ("OPTIONS.FILE_HINT", "Документ, изображение, аудио или видео"),
    ("OPTIONS.NAVIGATION", "Навигация (местоположение)"),
    ("OPTIONS.PHONE", "Телефон"),
    ("OPTIONS.EMAIL", "Электронная почта"),
    ("LAYER_THEME.REGION", "Область"),
    ("LAYER_THEME.DISTRICT", "Район"),
    ("LAYER_THEME.POPULATION_CENTERS", "Населённые пункты"),
    ("LAYER_THEME.INDUSTRY", "Промышленность"),
    ("LAYER_THEME.AGRICULTURE", "Сельское хозяйство"),
    ("LAYER_THEME.POWERHOUSE", "Электростанции"),
    ("LAYER_THEME.SCIENCE_CULTURE", "Наука и культура"),
    ("FILE_TYPE.IMG", "Изображение"),
    ("FILE_TYPE.TEXT", "Текст"),
    ("FILE_TYPE.AUDIO", "Аудио"),
    ("FILE_TYPE.VIDEO", "Видео"),
    ("FILE_TYPE.DIAGRAM", "Диаграмма"),
    ("FILE_TYPE.MAP_SCHEME", "Карта или схема"),
    ("FILE_TYPE.TABLE", "Таблица"),
    ("FILE_TYPE.LINK", "Ссылка"),
    ("ACCEPTED", "Заявка принята"),
    ("REJECTED", "Заявка не принята"),
    ("ERROR", "Ошибка"),
    ("CLOSE", "Закрыть"),
    ("SENDING", "Отправка..."),
    ("SUBMIT", "Отправить"),
    ("VALIDATION.REQUIRED", "Обязательное поле"),
    ("VALIDATION.EMAIL", "Неверный адрес электронной почты"),
    ("VALIDATION.OVERSIZE", "Размер файла не должен превышать {max} МБ"),
    ("VALIDATION.FILE_TYPE", "Недопустимый тип файла"),
];

pub(crate) const UZ: &[(&str, &str)] = &[
    ("OPTIONS.FIO", "F.I.Sh."),
    ("OPTIONS.WORK", "Ish joyi"),
    ("OPTIONS.WORK_HINT", "Tashkilot yoki muassasa"),
    ("OPTIONS.POSITION", "Lavozim"),
    ("OPTIONS.POSITION_HINT", "Egallab turgan lavozim"),
    ("OPTIONS.LAYER_THEME", "Qatlam mavzusi"),
    ("OPTIONS.CHRONOLOGY", "Xronologiya"),
    ("OPTIONS.FILE_TYPE", "Fayl turi"),
    ("OPTIONS.FILE", "Fayl"),
    ("OPTIONS.FILE_HINT", "Hujjat, rasm, audio yoki video"),
    ("OPTIONS.NAVIGATION", "Navigatsiya (joylashuv)"),
    ("OPTIONS.PHONE", "Telefon"),
    ("OPTIONS.EMAIL", "Elektron pochta"),
    ("LAYER_THEME.REGION", "Viloyat"),
    ("LAYER_THEME.DISTRICT", "Tuman"),
    ("LAYER_THEME.POPULATION_CENTERS", "Aholi punktlari"),
    ("LAYER_THEME.INDUSTRY", "Sanoat"),
    ("LAYER_THEME.AGRICULTURE", "Qishloq xo\u{2018}jaligi"),
    ("LAYER_THEME.POWERHOUSE", "Elektr stansiyalari"),
    ("LAYER_THEME.SCIENCE_CULTURE", "Fan va madaniyat"),
    ("FILE_TYPE.IMG", "Rasm"),
    ("FILE_TYPE.TEXT", "Matn"),
    ("FILE_TYPE.AUDIO", "Audio"),
    ("FILE_TYPE.VIDEO", "Video"),
    ("FILE_TYPE.DIAGRAM", "Diagramma"),
    ("FILE_TYPE.MAP_SCHEME", "Xarita yoki sxema"),
    ("FILE_TYPE.TABLE", "Jadval"),
    ("FILE_TYPE.LINK", "Havola"),
    ("ACCEPTED", "Ariza qabul qilindi"),
    ("REJECTED", "Ariza qabul qilinmadi"),
    ("ERROR", "Xatolik"),
    ("CLOSE", "Yopish"),
    ("SENDING", "Yuborilmoqda..."),
    ("SUBMIT", "Yuborish"),
    ("VALIDATION.REQUIRED", "Majburiy maydon"),
    ("VALIDATION.EMAIL", "Elektron pochta manzili noto\u{2018}g\u{2018}ri"),
    ("VALIDATION.OVERSIZE", "Fayl hajmi {max} MB dan oshmasligi kerak"),
    ("VALIDATION.FILE_TYPE", "Ruxsat etilmagan fayl turi"),
];
